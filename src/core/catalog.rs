//! The content-switching resources an appliance exposes through NITRO.
//!
//! Field lists are in the order the appliance documents them, which is also the order in which
//! they appear in outgoing payloads and search filters.

use crate::core::field::Field;
use crate::core::resource::{Resource, Verb};

use Verb::*;

const READ_ONLY: &[Verb] = &[Get];
const BINDING: &[Verb] = &[Add, Get];

/// Fields shared by most `csvserver_*policy_binding` resources.
const POLICY_BINDING: &[Field] = &[
    Field::int("priority"),
    Field::str("bindpoint"),
    Field::str("policyname"),
    Field::str("labelname"),
    Field::str("name"),
    Field::str("targetlbvserver"),
    Field::str("gotopriorityexpression"),
    Field::bool("invoke"),
    Field::str("labeltype"),
];

/// Same as [POLICY_BINDING], but the appliance lists `gotopriorityexpression` before
/// `targetlbvserver` for these bindings.
const POLICY_BINDING_GOTO_FIRST: &[Field] = &[
    Field::int("priority"),
    Field::str("bindpoint"),
    Field::str("policyname"),
    Field::str("labelname"),
    Field::str("name"),
    Field::str("gotopriorityexpression"),
    Field::str("targetlbvserver"),
    Field::bool("invoke"),
    Field::str("labeltype"),
];

const POLICY_LOOKUP: &[Field] = &[Field::str("policyname"), Field::str("domain")];

const CSACTION: &[Field] = &[
    Field::str("name"),
    Field::str("targetlbvserver"),
    Field::str("targetvserver"),
    Field::str("targetvserverexpr"),
    Field::str("comment"),
    Field::str("newname"),
];

const CSPOLICY: &[Field] = &[
    Field::str("policyname"),
    Field::str("url"),
    Field::str("rule"),
    Field::str("domain"),
    Field::str("action"),
    Field::str("logaction"),
    Field::str("newname"),
];

const CSPOLICYLABEL_CSPOLICY_BINDING: &[Field] = &[
    Field::int("priority"),
    Field::str("policyname"),
    Field::str("labelname"),
    Field::str("targetvserver"),
    Field::str("invoke_labelname"),
    Field::str("gotopriorityexpression"),
    Field::bool("invoke"),
    Field::str("labeltype"),
];

const CSVSERVER: &[Field] = &[
    Field::str("name"),
    Field::int("td"),
    Field::str("servicetype"),
    Field::str("ipv46"),
    Field::str("targettype"),
    Field::str("dnsrecordtype"),
    Field::int("persistenceid"),
    Field::str("ippattern"),
    Field::str("ipmask"),
    Field::int("range"),
    Field::int("port"),
    Field::str("state"),
    Field::str("stateupdate"),
    Field::str("cacheable"),
    Field::str("redirecturl"),
    Field::int("clttimeout"),
    Field::str("precedence"),
    Field::str("casesensitive"),
    Field::str("somethod"),
    Field::str("sopersistence"),
    Field::int("sopersistencetimeout"),
    Field::int("sothreshold"),
    Field::str("sobackupaction"),
    Field::str("redirectportrewrite"),
    Field::str("downstateflush"),
    Field::str("backupvserver"),
    Field::str("disableprimaryondown"),
    Field::str("insertvserveripport"),
    Field::str("vipheader"),
    Field::str("rtspnat"),
    Field::str("authenticationhost"),
    Field::str("authentication"),
    Field::str("listenpolicy"),
    Field::int("listenpriority"),
    Field::str("authn401"),
    Field::str("authnvsname"),
    Field::str("push"),
    Field::str("pushvserver"),
    Field::str("pushlabel"),
    Field::str("pushmulticlients"),
    Field::str("tcpprofilename"),
    Field::str("httpprofilename"),
    Field::str("dbprofilename"),
    Field::str("oracleserverversion"),
    Field::str("comment"),
    Field::str("mssqlserverversion"),
    Field::str("l2conn"),
    Field::int("mysqlprotocolversion"),
    Field::str("mysqlserverversion"),
    Field::int("mysqlcharacterset"),
    Field::int("mysqlservercapabilities"),
    Field::str("appflowlog"),
    Field::str("netprofile"),
    Field::str("icmpvsrresponse"),
    Field::str("rhistate"),
    Field::str("authnprofile"),
    Field::str("dnsprofilename"),
    Field::str("domainname"),
    Field::int("ttl"),
    Field::str("backupip"),
    Field::str("cookiedomain"),
    Field::int("cookietimeout"),
    Field::int("sitedomainttl"),
    Field::str("newname"),
];

const CSVSERVER_DOMAIN_BINDING: &[Field] = &[
    Field::str("backupip"),
    Field::int("ttl"),
    Field::str("name"),
    Field::str("domainname"),
    Field::int("sitedomainttl"),
    Field::str("cookiedomain"),
    Field::int("cookietimeout"),
];

/// Every resource, sorted by name.
pub static CATALOG: &[Resource] = &[
    Resource {
        name: "csaction",
        fields: CSACTION,
        filterable: true,
        verbs: &[Add, Update, Unset, Get],
    },
    Resource {
        name: "csparameter",
        fields: &[Field::str("stateupdate")],
        filterable: false,
        verbs: &[Update, Unset, Get],
    },
    Resource {
        name: "cspolicy",
        fields: CSPOLICY,
        filterable: true,
        verbs: &[Add, Update, Unset, Get],
    },
    Resource {
        name: "cspolicy_binding",
        fields: &[],
        filterable: false,
        verbs: READ_ONLY,
    },
    Resource {
        name: "cspolicy_crvserver_binding",
        fields: POLICY_LOOKUP,
        filterable: true,
        verbs: READ_ONLY,
    },
    Resource {
        name: "cspolicy_cspolicylabel_binding",
        fields: POLICY_LOOKUP,
        filterable: true,
        verbs: READ_ONLY,
    },
    Resource {
        name: "cspolicy_csvserver_binding",
        fields: POLICY_LOOKUP,
        filterable: true,
        verbs: READ_ONLY,
    },
    Resource {
        name: "cspolicylabel",
        fields: &[
            Field::str("labelname"),
            Field::str("cspolicylabeltype"),
            Field::str("newname"),
        ],
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "cspolicylabel_binding",
        fields: &[],
        filterable: false,
        verbs: READ_ONLY,
    },
    Resource {
        name: "cspolicylabel_cspolicy_binding",
        fields: CSPOLICYLABEL_CSPOLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver",
        fields: CSVSERVER,
        filterable: true,
        verbs: &[Add, Update, Unset, Enable, Disable, Get],
    },
    Resource {
        name: "csvserver_appflowpolicy_binding",
        fields: POLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_appfwpolicy_binding",
        fields: POLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_appqoepolicy_binding",
        fields: POLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_auditnslogpolicy_binding",
        fields: POLICY_BINDING_GOTO_FIRST,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_auditsyslogpolicy_binding",
        fields: POLICY_BINDING_GOTO_FIRST,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_authorizationpolicy_binding",
        fields: POLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_binding",
        fields: &[],
        filterable: false,
        verbs: READ_ONLY,
    },
    Resource {
        name: "csvserver_cachepolicy_binding",
        fields: POLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_cmppolicy_binding",
        fields: POLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_cspolicy_binding",
        fields: POLICY_BINDING_GOTO_FIRST,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_domain_binding",
        fields: CSVSERVER_DOMAIN_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_feopolicy_binding",
        fields: POLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_filterpolicy_binding",
        fields: POLICY_BINDING_GOTO_FIRST,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_gslbvserver_binding",
        fields: &[Field::str("vserver"), Field::str("name")],
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_lbvserver_binding",
        fields: &[
            Field::str("name"),
            Field::str("targetvserver"),
            Field::str("lbvserver"),
        ],
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_responderpolicy_binding",
        fields: POLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_rewritepolicy_binding",
        fields: POLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_spilloverpolicy_binding",
        fields: POLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_tmtrafficpolicy_binding",
        fields: POLICY_BINDING_GOTO_FIRST,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_transformpolicy_binding",
        fields: POLICY_BINDING,
        filterable: true,
        verbs: BINDING,
    },
    Resource {
        name: "csvserver_vpnvserver_binding",
        fields: &[Field::str("vserver"), Field::str("name")],
        filterable: true,
        verbs: BINDING,
    },
];
